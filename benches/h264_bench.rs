//! Zhen 解码核心性能基准测试.
//!
//! 覆盖帧内预测, CAVLC 残差解码与反变换等热路径.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use zhen::codec::h264::cavlc::decode_residual_block;
use zhen::codec::h264::geometry::{MbNeighbor, NeighborCtx};
use zhen::codec::h264::intra::{Intra16x16Mode, IntraLumaMxMMode, predict_4x4, predict_16x16};
use zhen::codec::h264::samples::{RefSamples, gather_refs};
use zhen::codec::h264::transform::{
    Block4x4, Block8x8, inverse_transform_4x4, inverse_transform_8x8,
};
use zhen::core::bitreader::BitReader;

/// 内部宏块的参考样本带, 邻居样本取坐标的确定性函数
fn make_refs(width: usize, height: usize, extend_top: bool) -> RefSamples {
    let ctx = NeighborCtx::frame(12, 11);
    let source = |mb: MbNeighbor, x: i32, y: i32| -> Option<i32> {
        if mb.available {
            Some(((x * 7 + y * 13) & 0xFF) as i32)
        } else {
            None
        }
    };
    gather_refs(&ctx, &source, true, 0, 0, width, height, extend_top).unwrap()
}

fn bench_predict_4x4(c: &mut Criterion) {
    c.bench_function("intra_predict_4x4_diag_down_left", |b| {
        let refs = make_refs(4, 4, true);
        b.iter(|| {
            let pred =
                predict_4x4(12, IntraLumaMxMMode::DiagDownLeft, black_box(&refs), 8).unwrap();
            black_box(pred);
        });
    });
}

fn bench_predict_16x16_plane(c: &mut Criterion) {
    c.bench_function("intra_predict_16x16_plane", |b| {
        let refs = make_refs(16, 16, false);
        b.iter(|| {
            let pred = predict_16x16(12, Intra16x16Mode::Plane, black_box(&refs), 8).unwrap();
            black_box(pred);
        });
    });
}

fn bench_cavlc_residual(c: &mut Criterion) {
    c.bench_function("cavlc_residual_block_2_coeffs", |b| {
        // coeff_token (2,2) 加两个拖尾符号, total_zeros 与 run_before
        let data = [0b0010_1110, 0b0000_0000];
        b.iter(|| {
            let mut br = BitReader::new(black_box(&data));
            let block = decode_residual_block(&mut br, 0, 0, 15, 16).unwrap();
            black_box(block);
        });
    });
}

fn bench_inverse_transform_4x4(c: &mut Criterion) {
    c.bench_function("inverse_transform_4x4_qp26", |b| {
        let mut coeffs: Block4x4 = [[0; 4]; 4];
        for (i, row) in coeffs.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = ((i * 4 + j) as i32 % 5) - 2;
            }
        }
        b.iter(|| {
            let block = inverse_transform_4x4(26, black_box(&coeffs), false, false);
            black_box(block);
        });
    });
}

fn bench_inverse_transform_8x8(c: &mut Criterion) {
    c.bench_function("inverse_transform_8x8_qp26", |b| {
        let mut coeffs: Block8x8 = [[0; 8]; 8];
        for (i, row) in coeffs.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = ((i * 8 + j) as i32 % 7) - 3;
            }
        }
        b.iter(|| {
            let block = inverse_transform_8x8(26, black_box(&coeffs), false);
            black_box(block);
        });
    });
}

criterion_group!(
    benches,
    bench_predict_4x4,
    bench_predict_16x16_plane,
    bench_cavlc_residual,
    bench_inverse_transform_4x4,
    bench_inverse_transform_8x8,
);
criterion_main!(benches);
