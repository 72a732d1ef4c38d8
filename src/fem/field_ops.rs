use crate::StrError;
use russell_lab::Vector;

/// Performs the elementwise product w = u ⊙ v
pub fn vec_mul_elem(w: &mut Vector, u: &Vector, v: &Vector) -> Result<(), StrError> {
    let n = w.dim();
    if u.dim() != n || v.dim() != n {
        return Err("vectors are incompatible");
    }
    for i in 0..n {
        w[i] = u[i] * v[i];
    }
    Ok(())
}

/// Accumulates the scaled elementwise product w += alpha · u ⊙ v
pub fn vec_add_mul_elem(w: &mut Vector, alpha: f64, u: &Vector, v: &Vector) -> Result<(), StrError> {
    let n = w.dim();
    if u.dim() != n || v.dim() != n {
        return Err("vectors are incompatible");
    }
    for i in 0..n {
        w[i] += alpha * u[i] * v[i];
    }
    Ok(())
}

/// Replaces each entry by max(v_i, min)
///
/// NaN entries become `min`.
pub fn vec_clip_min(v: &mut Vector, min: f64) {
    for x in v.as_mut_data() {
        *x = f64::max(*x, min);
    }
}

/// Replaces each entry by min(v_i, max)
///
/// NaN entries become `max`.
pub fn vec_clip_max(v: &mut Vector, max: f64) {
    for x in v.as_mut_data() {
        *x = f64::min(*x, max);
    }
}

/// Replaces each entry by sqrt(max(v_i, 0))
pub fn vec_sqrt_clamped(v: &mut Vector) {
    for x in v.as_mut_data() {
        *x = f64::sqrt(f64::max(*x, 0.0));
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
