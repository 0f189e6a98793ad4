//! Row-major f32 matmul kernel used by `CpuBackend`.

/// Computes `a @ b` for row-major `a: [m, k]` and `b: [k, n]`.
///
/// Loop order is i-p-j so the inner loop streams contiguous rows of `b`
/// and `c`. Callers validate slice lengths.
pub fn matmul_f32(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    debug_assert_eq!(a.len(), m * k);
    debug_assert_eq!(b.len(), k * n);

    let mut c = vec![0.0f32; m * n];
    for i in 0..m {
        let c_row = &mut c[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            let b_row = &b[p * n..(p + 1) * n];
            for (c_ij, b_pj) in c_row.iter_mut().zip(b_row) {
                *c_ij += a_ip * b_pj;
            }
        }
    }
    c
}
