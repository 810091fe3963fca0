use docrank_core::{Error, Result};

/// Cosine of the angle between `a` and `b`, clamped to `[-1, 1]`.
///
/// Exactly 0 when either vector has zero magnitude or holds a non-finite
/// component. Each vector is scaled by its largest magnitude first, so very
/// large or very small components neither overflow nor underflow.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch { expected: a.len(), found: b.len() });
    }
    let (Some(scale_a), Some(scale_b)) = (max_magnitude(a), max_magnitude(b)) else {
        return Ok(0.0);
    };
    if scale_a == 0.0 || scale_b == 0.0 {
        return Ok(0.0);
    }
    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !cosine.is_finite() || cosine == 0.0 {
        return Ok(0.0);
    }
    Ok(cosine.clamp(-1.0, 1.0))
}

/// Largest absolute component; `None` if any component is NaN or infinite.
fn max_magnitude(v: &[f64]) -> Option<f64> {
    v.iter().try_fold(0.0f64, |max, x| x.is_finite().then(|| max.max(x.abs())))
}
