//! 宏块类型与宏块级状态.
//!
//! mb_type 以封闭枚举表示, 分区尺寸通过方法派发 (H.264 Table 7-11 至 7-18).
//! 宏块描述符缓存在按地址取模的环形缓存中, 供 CAVLC nC 推导等邻居查询使用.

use bitflags::bitflags;

// ============================================================
// 宏块类型
// ============================================================

/// 宏块类型 (封闭枚举, 代替语法元素 mb_type 的裸数值)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbType {
    /// Intra_4x4
    I4x4,
    /// Intra_8x8
    I8x8,
    /// Intra_16x16, 携带预测模式与 CBP 拆分
    I16x16 {
        pred_mode: u8,
        cbp_chroma: u8,
        cbp_luma: u8,
    },
    /// I_PCM
    IPcm,
    /// P_Skip
    PSkip,
    P16x16,
    P16x8,
    P8x16,
    P8x8,
    P8x8Ref0,
    /// B_Skip
    BSkip,
    BDirect16x16,
    B16x16,
    B16x8,
    B8x16,
    B8x8,
}

impl MbType {
    /// 是否为帧内编码宏块
    pub fn is_intra(self) -> bool {
        matches!(
            self,
            MbType::I4x4 | MbType::I8x8 | MbType::I16x16 { .. } | MbType::IPcm
        )
    }

    /// 是否为跳过宏块 (P_Skip / B_Skip)
    pub fn is_skip(self) -> bool {
        matches!(self, MbType::PSkip | MbType::BSkip)
    }

    /// 是否为含子宏块分区的 8x8 族 (P_8x8, P_8x8ref0, B_8x8)
    pub fn has_sub_mb_parts(self) -> bool {
        matches!(self, MbType::P8x8 | MbType::P8x8Ref0 | MbType::B8x8)
    }

    /// MbPartWidth (Table 7-14 / 7-17; 帧内宏块按 16 处理)
    pub fn mb_part_width(self) -> i32 {
        match self {
            MbType::P16x8 | MbType::B16x8 => 16,
            MbType::P8x16 | MbType::B8x16 => 8,
            MbType::P8x8 | MbType::P8x8Ref0 | MbType::B8x8 => 8,
            MbType::BDirect16x16 | MbType::BSkip => 8,
            _ => 16,
        }
    }

    /// MbPartHeight (Table 7-14 / 7-17; 帧内宏块按 16 处理)
    pub fn mb_part_height(self) -> i32 {
        match self {
            MbType::P16x8 | MbType::B16x8 => 8,
            MbType::P8x16 | MbType::B8x16 => 16,
            MbType::P8x8 | MbType::P8x8Ref0 | MbType::B8x8 => 8,
            MbType::BDirect16x16 | MbType::BSkip => 8,
            _ => 16,
        }
    }

    /// NumMbPart
    pub fn num_mb_parts(self) -> i32 {
        match self {
            MbType::P16x8 | MbType::P8x16 | MbType::B16x8 | MbType::B8x16 => 2,
            MbType::P8x8 | MbType::P8x8Ref0 | MbType::B8x8 => 4,
            _ => 1,
        }
    }
}

/// 子宏块类型 (Table 7-17 / 7-18)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMbType {
    P8x8,
    P8x4,
    P4x8,
    P4x4,
    BDirect8x8,
    B8x8,
    B8x4,
    B4x8,
    B4x4,
}

impl SubMbType {
    /// SubMbPartWidth
    pub fn sub_mb_part_width(self) -> i32 {
        match self {
            SubMbType::P8x8 | SubMbType::B8x8 | SubMbType::P8x4 | SubMbType::B8x4 => 8,
            SubMbType::BDirect8x8 => 4,
            _ => 4,
        }
    }

    /// SubMbPartHeight
    pub fn sub_mb_part_height(self) -> i32 {
        match self {
            SubMbType::P8x8 | SubMbType::B8x8 | SubMbType::P4x8 | SubMbType::B4x8 => 8,
            SubMbType::BDirect8x8 => 4,
            _ => 4,
        }
    }

    /// NumSubMbPart
    pub fn num_sub_mb_parts(self) -> i32 {
        match self {
            SubMbType::P8x8 | SubMbType::B8x8 => 1,
            SubMbType::P8x4 | SubMbType::P4x8 | SubMbType::B8x4 | SubMbType::B4x8 => 2,
            SubMbType::P4x4 | SubMbType::B4x4 | SubMbType::BDirect8x8 => 4,
        }
    }
}

bitflags! {
    /// 宏块标志位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MbFlags: u8 {
        /// 场宏块 (MBAFF 场对的成员)
        const FIELD = 1 << 0;
        /// 所有 AC 残差块因 CBP 为零而全零
        const ALL_AC_ZERO = 1 << 1;
    }
}

// ============================================================
// 宏块描述符
// ============================================================

/// 解码完成的宏块描述符, 供后续宏块的邻居查询使用
#[derive(Debug, Clone)]
pub struct MbRecord {
    pub mb_type: MbType,
    pub flags: MbFlags,
    /// CodedBlockPattern (亮度低 4 位, 色度高 2 位)
    pub cbp: u8,
    /// 各亮度 4x4 块的非零系数个数 (TotalCoeff)
    pub luma_total_coeff: [u8; 16],
    /// 各 Cb 4x4 块的非零系数个数
    pub cb_total_coeff: [u8; 16],
    /// 各 Cr 4x4 块的非零系数个数
    pub cr_total_coeff: [u8; 16],
    /// Intra_4x4 各块预测模式 (非 Intra_4x4 宏块为 DC)
    pub intra4x4_pred_modes: [u8; 16],
    /// Intra_8x8 各块预测模式 (非 Intra_8x8 宏块为 DC)
    pub intra8x8_pred_modes: [u8; 4],
}

impl MbRecord {
    pub fn new(mb_type: MbType) -> Self {
        Self {
            mb_type,
            flags: MbFlags::empty(),
            cbp: 0,
            luma_total_coeff: [0; 16],
            cb_total_coeff: [0; 16],
            cr_total_coeff: [0; 16],
            intra4x4_pred_modes: [2; 16],
            intra8x8_pred_modes: [2; 4],
        }
    }

    /// 亮度 CBP (低 4 位)
    pub fn cbp_luma(&self) -> u8 {
        self.cbp & 0x0F
    }

    /// 色度 CBP (高 2 位)
    pub fn cbp_chroma(&self) -> u8 {
        self.cbp >> 4
    }
}

// ============================================================
// 按地址索引的环形缓存
// ============================================================

/// 按宏块地址取模索引的固定容量环形缓存.
///
/// 解码按地址递增进行, 邻居查询只会回看约一行宏块, 因此容量取
/// `pic_width_in_mbs * 2` 即可覆盖 A/B/C/D 邻居 (MBAFF 场对占两个地址).
/// 写入直接覆盖同槽旧条目, 读取时校验存储的地址防止串位.
#[derive(Debug)]
pub struct ByAddressCache<T> {
    slots: Vec<Option<(i32, T)>>,
}

impl<T> ByAddressCache<T> {
    /// 创建缓存, 容量应为 `pic_width_in_mbs * 2` (MBAFF 下再翻倍)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// 插入条目, 覆盖同槽旧条目
    pub fn insert(&mut self, addr: i32, value: T) {
        if addr < 0 {
            return;
        }
        let idx = addr as usize % self.slots.len();
        self.slots[idx] = Some((addr, value));
    }

    /// 查询指定地址的条目
    pub fn get(&self, addr: i32) -> Option<&T> {
        if addr < 0 {
            return None;
        }
        let idx = addr as usize % self.slots.len();
        match &self.slots[idx] {
            Some((stored, value)) if *stored == addr => Some(value),
            _ => None,
        }
    }

    /// 清空全部条目 (条带边界调用)
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mb_part_dims() {
        assert_eq!(MbType::P16x8.mb_part_width(), 16);
        assert_eq!(MbType::P16x8.mb_part_height(), 8);
        assert_eq!(MbType::P8x16.mb_part_width(), 8);
        assert_eq!(MbType::P8x16.mb_part_height(), 16);
        assert_eq!(MbType::PSkip.mb_part_width(), 16);
        assert_eq!(MbType::BDirect16x16.mb_part_width(), 8);
        assert_eq!(MbType::I4x4.mb_part_width(), 16);
        assert_eq!(MbType::P16x8.num_mb_parts(), 2);
        assert_eq!(MbType::P8x8.num_mb_parts(), 4);
    }

    #[test]
    fn test_sub_mb_part_dims() {
        assert_eq!(SubMbType::P8x4.sub_mb_part_width(), 8);
        assert_eq!(SubMbType::P8x4.sub_mb_part_height(), 4);
        assert_eq!(SubMbType::P4x8.sub_mb_part_width(), 4);
        assert_eq!(SubMbType::P4x8.sub_mb_part_height(), 8);
        assert_eq!(SubMbType::B4x4.num_sub_mb_parts(), 4);
        assert_eq!(SubMbType::BDirect8x8.num_sub_mb_parts(), 4);
    }

    #[test]
    fn test_mb_type_predicates() {
        assert!(MbType::I4x4.is_intra());
        assert!(MbType::IPcm.is_intra());
        assert!(!MbType::P16x16.is_intra());
        assert!(MbType::PSkip.is_skip());
        assert!(MbType::P8x8Ref0.has_sub_mb_parts());
    }

    #[test]
    fn test_cbp_split() {
        let mut rec = MbRecord::new(MbType::I4x4);
        rec.cbp = 0b10_1101;
        assert_eq!(rec.cbp_luma(), 0b1101);
        assert_eq!(rec.cbp_chroma(), 0b10);
    }

    #[test]
    fn test_cache_roundtrip() {
        let mut cache: ByAddressCache<u32> = ByAddressCache::new(22);
        cache.insert(0, 100);
        cache.insert(10, 110);
        assert_eq!(cache.get(0), Some(&100));
        assert_eq!(cache.get(10), Some(&110));
        assert_eq!(cache.get(5), None, "未写入的地址不应命中");
    }

    #[test]
    fn test_cache_overwrite_same_slot() {
        // 容量 22, 地址 0 与 22 共用槽位
        let mut cache: ByAddressCache<u32> = ByAddressCache::new(22);
        cache.insert(0, 100);
        cache.insert(22, 122);
        assert_eq!(cache.get(22), Some(&122));
        assert_eq!(cache.get(0), None, "被覆盖的旧地址不应命中");
    }

    #[test]
    fn test_cache_clear() {
        let mut cache: ByAddressCache<u32> = ByAddressCache::new(4);
        cache.insert(1, 1);
        cache.clear();
        assert_eq!(cache.get(1), None);
    }
}
