//! 图像序号 (POC) 推导 (ITU-T H.264 条款 8.2.1).
//!
//! 三种 pic_order_cnt_type 的推导都以值结构返回 (poc, top, bottom, msb),
//! 跨图像状态 (前一参考图像的 MSB/LSB, frame_num 偏移) 收在 PocContext 中,
//! IDR 图像将其复位. 序列与条带头字段按值拷入, 不依赖 RBSP 层.

use log::debug;

/// POC 推导所需的序列级参数
#[derive(Debug, Clone, Default)]
pub struct PocConfig {
    /// pic_order_cnt_type (0 / 1 / 2)
    pub poc_type: u8,
    pub log2_max_poc_lsb: u32,
    pub log2_max_frame_num: u32,
    pub offset_for_non_ref_pic: i32,
    pub offset_for_top_to_bottom_field: i32,
    /// offset_for_ref_frame, 长度即 num_ref_frames_in_pic_order_cnt_cycle
    pub offset_for_ref_frame: Vec<i32>,
}

impl PocConfig {
    fn max_poc_lsb(&self) -> i32 {
        1i32 << self.log2_max_poc_lsb.min(30)
    }

    fn max_frame_num(&self) -> i32 {
        1i32 << self.log2_max_frame_num.min(30)
    }
}

/// 单幅图像的 POC 推导输入 (条带头字段值拷贝)
#[derive(Debug, Clone, Default)]
pub struct PocInput {
    pub is_idr: bool,
    pub nal_ref_idc: u8,
    pub frame_num: u32,
    /// 解码顺序上前一图像的 frame_num
    pub prev_frame_num: u32,
    pub field_pic: bool,
    pub bottom_field: bool,
    /// pic_order_cnt_lsb (仅类型 0)
    pub pic_order_cnt_lsb: Option<u32>,
    pub delta_poc_bottom: i32,
    pub delta_poc_0: i32,
    pub delta_poc_1: i32,
}

/// 推导结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poc {
    /// 图像序号 (帧图像取 top 与 bottom 的较小者)
    pub poc: i32,
    pub top: i32,
    pub bottom: i32,
    pub msb: i32,
}

impl Poc {
    fn frame(top: i32, bottom: i32, msb: i32) -> Self {
        Self {
            poc: top.min(bottom),
            top,
            bottom,
            msb,
        }
    }

    fn field(top: i32, bottom: i32, msb: i32, bottom_field: bool) -> Self {
        Self {
            poc: if bottom_field { bottom } else { top },
            top,
            bottom,
            msb,
        }
    }
}

/// 跨图像的 POC 推导状态
#[derive(Debug, Clone, Default)]
pub struct PocContext {
    prev_ref_poc_msb: i32,
    prev_ref_poc_lsb: i32,
    prev_frame_num_offset: i32,
}

impl PocContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// 序列边界复位
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 推导当前图像的 POC, 并推进跨图像状态
    pub fn compute(&mut self, cfg: &PocConfig, input: &PocInput) -> Poc {
        if input.is_idr {
            self.reset();
        }

        let poc = match cfg.poc_type {
            0 => self.compute_type0(cfg, input),
            1 => self.compute_type1(cfg, input),
            _ => self.compute_type2(cfg, input),
        };
        debug!(
            "POC 类型 {}: frame_num={} poc={} (top={}, bottom={})",
            cfg.poc_type, input.frame_num, poc.poc, poc.top, poc.bottom
        );
        poc
    }

    fn compute_type0(&mut self, cfg: &PocConfig, input: &PocInput) -> Poc {
        let Some(poc_lsb_u32) = input.pic_order_cnt_lsb else {
            // 类型 0 缺少 lsb 字段时退化为 frame_num 顺序
            let n = input.frame_num as i32;
            return Poc::frame(n, n, 0);
        };
        let max_poc_lsb = cfg.max_poc_lsb();
        let poc_lsb = poc_lsb_u32 as i32;

        let mut poc_msb = self.prev_ref_poc_msb;
        if !input.is_idr {
            if poc_lsb < self.prev_ref_poc_lsb
                && (self.prev_ref_poc_lsb - poc_lsb) >= (max_poc_lsb / 2)
            {
                poc_msb += max_poc_lsb;
            } else if poc_lsb > self.prev_ref_poc_lsb
                && (poc_lsb - self.prev_ref_poc_lsb) > (max_poc_lsb / 2)
            {
                poc_msb -= max_poc_lsb;
            }
        }

        let top = poc_msb + poc_lsb;
        let bottom = if input.field_pic {
            top
        } else {
            top + input.delta_poc_bottom
        };

        if input.nal_ref_idc != 0 {
            self.prev_ref_poc_msb = poc_msb;
            self.prev_ref_poc_lsb = poc_lsb;
        }

        if input.field_pic {
            Poc::field(top, bottom, poc_msb, input.bottom_field)
        } else {
            Poc::frame(top, bottom, poc_msb)
        }
    }

    fn compute_type1(&mut self, cfg: &PocConfig, input: &PocInput) -> Poc {
        let frame_num_offset = self.advance_frame_num_offset(cfg, input);

        let mut abs_frame_num = if cfg.offset_for_ref_frame.is_empty() {
            0
        } else {
            frame_num_offset + input.frame_num as i32
        };
        if input.nal_ref_idc == 0 && abs_frame_num > 0 {
            abs_frame_num -= 1;
        }

        let mut expected = 0i32;
        if abs_frame_num > 0 && !cfg.offset_for_ref_frame.is_empty() {
            let cycle_len = cfg.offset_for_ref_frame.len() as i32;
            let delta_per_cycle: i32 = cfg.offset_for_ref_frame.iter().sum();
            let cycle_cnt = (abs_frame_num - 1) / cycle_len;
            let num_in_cycle = (abs_frame_num - 1) % cycle_len;
            expected = cycle_cnt * delta_per_cycle;
            for i in 0..=num_in_cycle {
                expected += cfg.offset_for_ref_frame[i as usize];
            }
        }
        if input.nal_ref_idc == 0 {
            expected += cfg.offset_for_non_ref_pic;
        }

        if input.field_pic {
            let top = expected + input.delta_poc_0;
            let bottom = expected + cfg.offset_for_top_to_bottom_field + input.delta_poc_0;
            Poc::field(top, bottom, 0, input.bottom_field)
        } else {
            let top = expected + input.delta_poc_0;
            let bottom = top + cfg.offset_for_top_to_bottom_field + input.delta_poc_1;
            Poc::frame(top, bottom, 0)
        }
    }

    fn compute_type2(&mut self, cfg: &PocConfig, input: &PocInput) -> Poc {
        let frame_num_offset = self.advance_frame_num_offset(cfg, input);

        let temp = if input.is_idr {
            0
        } else if input.nal_ref_idc == 0 {
            2 * (frame_num_offset + input.frame_num as i32) - 1
        } else {
            2 * (frame_num_offset + input.frame_num as i32)
        };

        if input.field_pic {
            Poc::field(temp, temp, 0, input.bottom_field)
        } else {
            Poc::frame(temp, temp, 0)
        }
    }

    /// 类型 1/2 共用的 FrameNumOffset 推进 (frame_num 回绕检测)
    fn advance_frame_num_offset(&mut self, cfg: &PocConfig, input: &PocInput) -> i32 {
        let mut offset = if input.is_idr {
            0
        } else {
            self.prev_frame_num_offset
        };
        if !input.is_idr && input.prev_frame_num as i32 > input.frame_num as i32 {
            offset += cfg.max_frame_num();
        }
        if input.nal_ref_idc != 0 {
            self.prev_frame_num_offset = offset;
        }
        offset
    }
}
