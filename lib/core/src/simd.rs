// SIMD equality counting for the similarity kernel
// Same dispatch hierarchy as the float kernels this grew out of:
// AVX2 -> SSE2 -> NEON -> scalar, chosen at runtime per call

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

// Minimum lengths before the vector paths pay off
#[cfg(target_arch = "x86_64")]
const MIN_BYTES_AVX: usize = 32;

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
const MIN_BYTES_SIMD: usize = 16;

#[cfg(target_arch = "x86_64")]
const MIN_LANES_I32_AVX: usize = 8;

#[cfg(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"))]
const MIN_LANES_I32_SIMD: usize = 4;

/// Element types the similarity kernel can compare position by position
///
/// `count_equal` only looks at the common prefix when lengths differ;
/// matrix rows always share a width so this never happens in the kernel.
pub trait Comparable: Copy + PartialEq + Send + Sync {
    #[inline]
    fn count_equal(a: &[Self], b: &[Self]) -> usize {
        count_equal_scalar(a, b)
    }
}

impl Comparable for u8 {
    #[inline]
    fn count_equal(a: &[Self], b: &[Self]) -> usize {
        count_equal_bytes(a, b)
    }
}

impl Comparable for i8 {
    #[inline]
    fn count_equal(a: &[Self], b: &[Self]) -> usize {
        count_equal_bytes(as_bytes_i8(a), as_bytes_i8(b))
    }
}

impl Comparable for bool {
    #[inline]
    fn count_equal(a: &[Self], b: &[Self]) -> usize {
        count_equal_bytes(as_bytes_bool(a), as_bytes_bool(b))
    }
}

impl Comparable for i16 {}

impl Comparable for i32 {
    #[inline]
    fn count_equal(a: &[Self], b: &[Self]) -> usize {
        count_equal_i32(a, b)
    }
}

impl Comparable for i64 {}

/// Fraction of positions where `a` and `b` agree, in [0, 1]
///
/// Two empty rows agree vacuously and score 1.0.
#[inline]
pub fn agreement<T: Comparable>(a: &[T], b: &[T]) -> f32 {
    let width = a.len().max(b.len());
    if width == 0 {
        return 1.0;
    }
    (T::count_equal(a, b) as f64 / width as f64) as f32
}

#[inline]
fn as_bytes_i8(v: &[i8]) -> &[u8] {
    // SAFETY: i8 and u8 share size, alignment and have no invalid values
    unsafe { std::slice::from_raw_parts(v.as_ptr().cast::<u8>(), v.len()) }
}

#[inline]
fn as_bytes_bool(v: &[bool]) -> &[u8] {
    // SAFETY: bool is one byte holding 0 or 1; reading it as u8 is always valid
    unsafe { std::slice::from_raw_parts(v.as_ptr().cast::<u8>(), v.len()) }
}

/// Count equal bytes over the common prefix of `a` and `b`
#[inline]
pub fn count_equal_bytes(a: &[u8], b: &[u8]) -> usize {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && n >= MIN_BYTES_AVX {
            return unsafe { count_equal_bytes_avx2(a, b) };
        }
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("sse2") && n >= MIN_BYTES_SIMD {
            return unsafe { count_equal_bytes_sse2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && n >= MIN_BYTES_SIMD {
            return unsafe { count_equal_bytes_neon(a, b) };
        }
    }

    count_equal_scalar(a, b)
}

/// Count equal 32-bit lanes over the common prefix of `a` and `b`
#[inline]
pub fn count_equal_i32(a: &[i32], b: &[i32]) -> usize {
    let n = a.len().min(b.len());
    let (a, b) = (&a[..n], &b[..n]);

    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx2") && n >= MIN_LANES_I32_AVX {
            return unsafe { count_equal_i32_avx2(a, b) };
        }
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("sse2") && n >= MIN_LANES_I32_SIMD {
            return unsafe { count_equal_i32_sse2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if std::arch::is_aarch64_feature_detected!("neon") && n >= MIN_LANES_I32_SIMD {
            return unsafe { count_equal_i32_neon(a, b) };
        }
    }

    count_equal_scalar(a, b)
}

/// AVX2: compare 32 bytes per step, popcount the movemask
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn count_equal_bytes_avx2(a: &[u8], b: &[u8]) -> usize {
    let n = a.len();
    let mut i = 0;
    let mut count = 0usize;

    while i + 32 <= n {
        let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
        let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
        let mask = _mm256_movemask_epi8(_mm256_cmpeq_epi8(va, vb)) as u32;
        count += mask.count_ones() as usize;
        i += 32;
    }

    count + count_equal_scalar(&a[i..], &b[i..])
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn count_equal_bytes_sse2(a: &[u8], b: &[u8]) -> usize {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    let n = a.len();
    let mut i = 0;
    let mut count = 0usize;

    while i + 16 <= n {
        let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
        let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
        let mask = _mm_movemask_epi8(_mm_cmpeq_epi8(va, vb)) as u32;
        count += mask.count_ones() as usize;
        i += 16;
    }

    count + count_equal_scalar(&a[i..], &b[i..])
}

/// NEON: equal lanes become 0xFF, shift down to 1 and sum across the register
#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn count_equal_bytes_neon(a: &[u8], b: &[u8]) -> usize {
    let n = a.len();
    let mut i = 0;
    let mut count = 0usize;

    while i + 16 <= n {
        let va = vld1q_u8(a.as_ptr().add(i));
        let vb = vld1q_u8(b.as_ptr().add(i));
        let ones = vshrq_n_u8::<7>(vceqq_u8(va, vb));
        count += vaddvq_u8(ones) as usize;
        i += 16;
    }

    count + count_equal_scalar(&a[i..], &b[i..])
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
#[inline]
unsafe fn count_equal_i32_avx2(a: &[i32], b: &[i32]) -> usize {
    let n = a.len();
    let mut i = 0;
    let mut count = 0usize;

    while i + 8 <= n {
        let va = _mm256_loadu_si256(a.as_ptr().add(i) as *const __m256i);
        let vb = _mm256_loadu_si256(b.as_ptr().add(i) as *const __m256i);
        let eq = _mm256_cmpeq_epi32(va, vb);
        let mask = _mm256_movemask_ps(_mm256_castsi256_ps(eq)) as u32;
        count += mask.count_ones() as usize;
        i += 8;
    }

    count + count_equal_scalar(&a[i..], &b[i..])
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
#[target_feature(enable = "sse2")]
#[inline]
unsafe fn count_equal_i32_sse2(a: &[i32], b: &[i32]) -> usize {
    #[cfg(target_arch = "x86")]
    use std::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use std::arch::x86_64::*;

    let n = a.len();
    let mut i = 0;
    let mut count = 0usize;

    while i + 4 <= n {
        let va = _mm_loadu_si128(a.as_ptr().add(i) as *const __m128i);
        let vb = _mm_loadu_si128(b.as_ptr().add(i) as *const __m128i);
        let eq = _mm_cmpeq_epi32(va, vb);
        let mask = _mm_movemask_ps(_mm_castsi128_ps(eq)) as u32;
        count += mask.count_ones() as usize;
        i += 4;
    }

    count + count_equal_scalar(&a[i..], &b[i..])
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn count_equal_i32_neon(a: &[i32], b: &[i32]) -> usize {
    let n = a.len();
    let mut i = 0;
    let mut count = 0usize;

    while i + 4 <= n {
        let va = vld1q_s32(a.as_ptr().add(i));
        let vb = vld1q_s32(b.as_ptr().add(i));
        let ones = vshrq_n_u32::<31>(vceqq_s32(va, vb));
        count += vaddvq_u32(ones) as usize;
        i += 4;
    }

    count + count_equal_scalar(&a[i..], &b[i..])
}

/// Scalar fallback
#[inline]
fn count_equal_scalar<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b.iter()).filter(|(x, y)| x == y).count()
}
