//! 解码核心配置.
//!
//! 由调用方从已解析的 SPS/PPS 与条带头推导后按值注入, 核心不做 RBSP 解析.

/// 色度采样格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromaFormat {
    /// 4:0:0 仅亮度
    Monochrome,
    /// 4:2:0
    Yuv420,
    /// 4:2:2
    Yuv422,
    /// 4:4:4
    Yuv444,
}

impl ChromaFormat {
    /// ChromaArrayType (separate_colour_plane_flag=0 时等于 chroma_format_idc)
    pub fn chroma_array_type(self) -> i32 {
        match self {
            ChromaFormat::Monochrome => 0,
            ChromaFormat::Yuv420 => 1,
            ChromaFormat::Yuv422 => 2,
            ChromaFormat::Yuv444 => 3,
        }
    }

    /// 色度宏块宽度 MbWidthC
    pub fn mb_width_c(self) -> i32 {
        match self {
            ChromaFormat::Monochrome => 0,
            ChromaFormat::Yuv420 | ChromaFormat::Yuv422 => 8,
            ChromaFormat::Yuv444 => 16,
        }
    }

    /// 色度宏块高度 MbHeightC
    pub fn mb_height_c(self) -> i32 {
        match self {
            ChromaFormat::Monochrome => 0,
            ChromaFormat::Yuv420 => 8,
            ChromaFormat::Yuv422 | ChromaFormat::Yuv444 => 16,
        }
    }
}

/// 熵编码模式 (entropy_coding_mode_flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyMode {
    Cavlc,
    Cabac,
}

/// 宏块级解码核心的配置
///
/// 字段与 SPS/PPS 推导变量一一对应, 名称沿用标准记法.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// 图像宽度 (宏块数), PicWidthInMbs
    pub pic_width_in_mbs: i32,
    /// 图像高度 (宏块数), FrameHeightInMbs 或场高度
    pub pic_height_in_mbs: i32,
    /// 色度采样格式
    pub chroma_format: ChromaFormat,
    /// 亮度位深 BitDepthY
    pub bit_depth_luma: u8,
    /// 色度位深 BitDepthC
    pub bit_depth_chroma: u8,
    /// mb_adaptive_frame_field_flag && !field_pic_flag
    pub mbaff: bool,
    /// field_pic_flag
    pub field_pic: bool,
    /// constrained_intra_pred_flag
    pub constrained_intra_pred: bool,
    /// 熵编码模式
    pub entropy: EntropyMode,
}

impl CoreConfig {
    /// 图像宏块总数 PicSizeInMbs
    pub fn pic_size_in_mbs(&self) -> i32 {
        self.pic_width_in_mbs * self.pic_height_in_mbs
    }

    /// 亮度平面宽度 (样本数)
    pub fn pic_width_in_samples(&self) -> i32 {
        self.pic_width_in_mbs * 16
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            pic_width_in_mbs: 1,
            pic_height_in_mbs: 1,
            chroma_format: ChromaFormat::Yuv420,
            bit_depth_luma: 8,
            bit_depth_chroma: 8,
            mbaff: false,
            field_pic: false,
            constrained_intra_pred: false,
            entropy: EntropyMode::Cavlc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chroma_dims() {
        assert_eq!(ChromaFormat::Yuv420.mb_width_c(), 8);
        assert_eq!(ChromaFormat::Yuv420.mb_height_c(), 8);
        assert_eq!(ChromaFormat::Yuv422.mb_width_c(), 8);
        assert_eq!(ChromaFormat::Yuv422.mb_height_c(), 16);
        assert_eq!(ChromaFormat::Yuv444.mb_width_c(), 16);
        assert_eq!(ChromaFormat::Monochrome.mb_width_c(), 0);
    }

    #[test]
    fn test_pic_size() {
        let cfg = CoreConfig {
            pic_width_in_mbs: 11,
            pic_height_in_mbs: 9,
            ..CoreConfig::default()
        };
        assert_eq!(cfg.pic_size_in_mbs(), 99);
        assert_eq!(cfg.pic_width_in_samples(), 176);
    }
}
