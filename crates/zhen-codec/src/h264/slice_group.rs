//! 条带组映射 (ITU-T H.264 条款 8.2.2, FMO).
//!
//! 七种 slice_group_map_type 先生成映射单元到条带组的映射, 再按帧/场
//! 编码方式换算为宏块地址到条带组的映射. 条带解码用 next_mb_address
//! 在同组宏块间跳转.

use log::trace;

use super::error::{MbError, MbResult};

/// 条带组映射的图像参数集字段
#[derive(Debug, Clone, Default)]
pub struct SliceGroupParams {
    /// slice_group_map_type (0..=6)
    pub map_type: u8,
    pub num_slice_groups: u32,
    /// 类型 0: 每组的 run_length_minus1
    pub run_length_minus1: Vec<u32>,
    /// 类型 2: 各组前景矩形的左上角映射单元地址
    pub top_left: Vec<u32>,
    /// 类型 2: 各组前景矩形的右下角映射单元地址
    pub bottom_right: Vec<u32>,
    /// 类型 3/4/5: 变化方向
    pub change_direction_flag: bool,
    /// 类型 3/4/5: SliceGroupChangeRate
    pub slice_group_change_rate: u32,
    /// 类型 6: 显式 slice_group_id
    pub slice_group_id: Vec<u8>,
    pub pic_width_in_mbs: u32,
    pub pic_height_in_map_units: u32,
}

impl SliceGroupParams {
    pub fn pic_size_in_map_units(&self) -> u32 {
        self.pic_width_in_mbs * self.pic_height_in_map_units
    }

    /// MapUnitsInSliceGroup0 (条款 7-25), 由条带头的 change_cycle 算出
    pub fn map_units_in_slice_group0(&self, slice_group_change_cycle: u32) -> u32 {
        (slice_group_change_cycle * self.slice_group_change_rate).min(self.pic_size_in_map_units())
    }
}

/// 生成映射单元到条带组的映射 (8.2.2.1 至 8.2.2.7)
///
/// `slice_group_change_cycle` 仅在类型 3/4/5 下生效, 其余类型忽略.
pub fn map_unit_to_slice_group_map(
    params: &SliceGroupParams,
    slice_group_change_cycle: u32,
) -> MbResult<Vec<u8>> {
    let size = params.pic_size_in_map_units() as usize;
    if size == 0 || params.num_slice_groups == 0 {
        return Err(MbError::Unsupported("条带组映射的图像尺寸或组数为零"));
    }
    if params.num_slice_groups == 1 {
        return Ok(vec![0; size]);
    }

    let map = match params.map_type {
        0 => interleaved_map(params, size)?,
        1 => dispersed_map(params, size),
        2 => foreground_map(params, size)?,
        3 => box_out_map(params, size, slice_group_change_cycle),
        4 => raster_scan_map(params, size, slice_group_change_cycle),
        5 => wipe_map(params, size, slice_group_change_cycle),
        6 => explicit_map(params, size)?,
        _ => return Err(MbError::Unsupported("未知的 slice_group_map_type")),
    };
    trace!(
        "条带组映射: 类型 {} 组数 {} 单元数 {}",
        params.map_type, params.num_slice_groups, size
    );
    Ok(map)
}

/// 类型 0: 游程交织 (8.2.2.1)
fn interleaved_map(params: &SliceGroupParams, size: usize) -> MbResult<Vec<u8>> {
    if params.run_length_minus1.len() != params.num_slice_groups as usize {
        return Err(MbError::Unsupported("run_length_minus1 长度与组数不符"));
    }
    let mut map = vec![0u8; size];
    let mut i = 0usize;
    while i < size {
        for (group, &run) in params.run_length_minus1.iter().enumerate() {
            let mut j = 0u32;
            while j <= run && i < size {
                map[i] = group as u8;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(map)
}

/// 类型 1: 分散 (8.2.2.2)
fn dispersed_map(params: &SliceGroupParams, size: usize) -> Vec<u8> {
    let w = params.pic_width_in_mbs as usize;
    let groups = params.num_slice_groups as usize;
    (0..size)
        .map(|i| (((i % w) + ((i / w) * groups) / 2) % groups) as u8)
        .collect()
}

/// 类型 2: 前景矩形加背景 (8.2.2.3), 低编号组的矩形覆盖高编号组
fn foreground_map(params: &SliceGroupParams, size: usize) -> MbResult<Vec<u8>> {
    let rects = params.num_slice_groups as usize - 1;
    if params.top_left.len() < rects || params.bottom_right.len() < rects {
        return Err(MbError::Unsupported("前景矩形参数长度与组数不符"));
    }
    let w = params.pic_width_in_mbs;
    let mut map = vec![(params.num_slice_groups - 1) as u8; size];
    for group in (0..rects).rev() {
        let y_top = params.top_left[group] / w;
        let x_left = params.top_left[group] % w;
        let y_bottom = params.bottom_right[group] / w;
        let x_right = params.bottom_right[group] % w;
        for y in y_top..=y_bottom.min(params.pic_height_in_map_units.saturating_sub(1)) {
            for x in x_left..=x_right.min(w.saturating_sub(1)) {
                map[(y * w + x) as usize] = group as u8;
            }
        }
    }
    Ok(map)
}

/// 类型 3: 盒状扩展 (8.2.2.4), 组 0 从图像中心螺旋生长
fn box_out_map(params: &SliceGroupParams, size: usize, change_cycle: u32) -> Vec<u8> {
    let w = params.pic_width_in_mbs as i32;
    let h = params.pic_height_in_map_units as i32;
    let dir = params.change_direction_flag as i32;
    let units_in_group0 = params.map_units_in_slice_group0(change_cycle);

    let mut map = vec![1u8; size];
    let mut x = (w - dir) / 2;
    let mut y = (h - dir) / 2;
    let (mut left, mut top, mut right, mut bottom) = (x, y, x, y);
    let (mut x_dir, mut y_dir) = (dir - 1, dir);

    let mut k = 0u32;
    while k < units_in_group0 {
        let idx = (y * w + x) as usize;
        if map[idx] == 1 {
            map[idx] = 0;
            k += 1;
        }
        if x_dir == -1 && x == left {
            left = (left - 1).max(0);
            x = left;
            (x_dir, y_dir) = (0, 2 * dir - 1);
        } else if x_dir == 1 && x == right {
            right = (right + 1).min(w - 1);
            x = right;
            (x_dir, y_dir) = (0, 1 - 2 * dir);
        } else if y_dir == -1 && y == top {
            top = (top - 1).max(0);
            y = top;
            (x_dir, y_dir) = (1 - 2 * dir, 0);
        } else if y_dir == 1 && y == bottom {
            bottom = (bottom + 1).min(h - 1);
            y = bottom;
            (x_dir, y_dir) = (2 * dir - 1, 0);
        } else {
            x += x_dir;
            y += y_dir;
        }
    }
    map
}

/// 类型 4/5 共用: 左上侧组的单元数
fn size_of_upper_left_group(params: &SliceGroupParams, change_cycle: u32) -> u32 {
    let units0 = params.map_units_in_slice_group0(change_cycle);
    if params.change_direction_flag {
        params.pic_size_in_map_units() - units0
    } else {
        units0
    }
}

/// 类型 4: 光栅扫描推进 (8.2.2.5)
fn raster_scan_map(params: &SliceGroupParams, size: usize, change_cycle: u32) -> Vec<u8> {
    let upper_left = size_of_upper_left_group(params, change_cycle) as usize;
    let dir = params.change_direction_flag as u8;
    (0..size)
        .map(|i| if i < upper_left { dir } else { 1 - dir })
        .collect()
}

/// 类型 5: 列向擦除 (8.2.2.6)
fn wipe_map(params: &SliceGroupParams, size: usize, change_cycle: u32) -> Vec<u8> {
    let w = params.pic_width_in_mbs as usize;
    let h = params.pic_height_in_map_units as usize;
    let upper_left = size_of_upper_left_group(params, change_cycle) as usize;
    let dir = params.change_direction_flag as u8;

    let mut map = vec![0u8; size];
    let mut k = 0usize;
    for j in 0..w {
        for i in 0..h {
            map[i * w + j] = if k < upper_left { dir } else { 1 - dir };
            k += 1;
        }
    }
    map
}

/// 类型 6: 显式映射 (8.2.2.7)
fn explicit_map(params: &SliceGroupParams, size: usize) -> MbResult<Vec<u8>> {
    if params.slice_group_id.len() < size {
        return Err(MbError::Unsupported("slice_group_id 长度小于图像映射单元数"));
    }
    Ok(params.slice_group_id[..size].to_vec())
}

/// 映射单元映射换算为宏块地址映射 (8.2.2.8)
pub fn mb_to_slice_group_map(
    map_units: &[u8],
    pic_width_in_mbs: u32,
    frame_mbs_only: bool,
    field_pic: bool,
    mbaff: bool,
) -> Vec<u8> {
    if frame_mbs_only || field_pic {
        return map_units.to_vec();
    }
    let w = pic_width_in_mbs as usize;
    if mbaff {
        // 宏块对共享同一映射单元
        (0..map_units.len() * 2).map(|i| map_units[i / 2]).collect()
    } else {
        // 帧编码图像但序列允许场: 两行宏块折到一行映射单元
        (0..map_units.len() * 2)
            .map(|i| map_units[(i / (2 * w)) * w + (i % w)])
            .collect()
    }
}

/// 同条带组内下一宏块地址 (条款 8.2.2 末尾)
///
/// 超出图像末尾时返回 `map.len()`.
pub fn next_mb_address(map: &[u8], curr_addr: usize) -> usize {
    let mut i = curr_addr + 1;
    while i < map.len() && map[i] != map[curr_addr] {
        i += 1;
    }
    i
}
