use super::{contraction, SymTensorField};
use crate::base::{CS2_MAX, JLM_MIN, RELAXATION_TIME_FACTOR};
use crate::fem::vec_clip_max;
use crate::StrError;
use russell_lab::Vector;

/// Defines the phases of the Lagrangian averages
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AveragerPhase {
    /// The next computation seeds the averages from the instantaneous contractions
    Bootstrap,

    /// The averages are relaxed towards the instantaneous contractions
    Steady,
}

/// Averages the Germano identity contractions along (approximate) fluid pathlines
///
/// ```text
/// Bootstrap:  JLM ← Cs² (M:M)          JMM ← M:M
///
/// Steady:     γ = (JLM JMM)^(1/8) / (1.5 Δ)      ε = γ / (1 + γ)
///             JLM ← max(ε (L:M) + (1 - ε) JLM, 1e-32)
///             JMM ← ε (M:M) + (1 - ε) JMM
/// ```
///
/// The upstream values JLM(x - u Δt) and JMM(x - u Δt) are approximated by the local values.
pub struct LagrangianAverager {
    /// Current phase
    phase: AveragerPhase,

    /// Lagrangian average of L:M
    jlm: Vector,

    /// Lagrangian average of M:M
    jmm: Vector,

    /// Instantaneous L:M
    lm: Vector,

    /// Instantaneous M:M
    mm: Vector,
}

impl LagrangianAverager {
    /// Allocates a new instance with uniform initial averages
    pub fn new(ndof: usize, jlm_init: f64, jmm_init: f64) -> Self {
        LagrangianAverager {
            phase: AveragerPhase::Bootstrap,
            jlm: Vector::filled(ndof, jlm_init),
            jmm: Vector::filled(ndof, jmm_init),
            lm: Vector::new(ndof),
            mm: Vector::new(ndof),
        }
    }

    /// Returns the current phase
    pub fn phase(&self) -> AveragerPhase {
        self.phase
    }

    /// Returns the Lagrangian average of L:M
    pub fn jlm(&self) -> &Vector {
        &self.jlm
    }

    /// Returns the Lagrangian average of M:M
    pub fn jmm(&self) -> &Vector {
        &self.jmm
    }

    /// Advances the averages with new Lij and Mij tensors
    ///
    /// `cs` is the Smagorinsky constant seeding the averages in the bootstrap phase.
    pub fn advance(
        &mut self,
        lij: &SymTensorField,
        mij: &SymTensorField,
        delta_cg1_sq: &Vector,
        cs: f64,
    ) -> Result<(), StrError> {
        if delta_cg1_sq.dim() != self.jlm.dim() {
            return Err("delta_cg1_sq is incompatible with the averages");
        }
        contraction(&mut self.lm, lij, mij)?;
        contraction(&mut self.mm, mij, mij)?;
        match self.phase {
            AveragerPhase::Bootstrap => {
                for i in 0..self.jlm.dim() {
                    self.jlm[i] = cs * cs * self.mm[i];
                    self.jmm[i] = self.mm[i];
                }
                self.phase = AveragerPhase::Steady;
            }
            AveragerPhase::Steady => {
                for i in 0..self.jlm.dim() {
                    let product = f64::max(self.jlm[i] * self.jmm[i], 0.0);
                    let gamma = f64::powf(product, 0.125) / (RELAXATION_TIME_FACTOR * f64::sqrt(delta_cg1_sq[i]));
                    let eps = gamma / (1.0 + gamma);
                    self.jlm[i] = f64::max(eps * self.lm[i] + (1.0 - eps) * self.jlm[i], JLM_MIN);
                    self.jmm[i] = eps * self.mm[i] + (1.0 - eps) * self.jmm[i];
                }
            }
        }
        Ok(())
    }

    /// Computes the dynamic coefficient Cs² = min(JLM / JMM, 0.1)
    ///
    /// Non-finite ratios (e.g., JMM = 0) map to the upper bound.
    pub fn coefficient(&self, cs2: &mut Vector) -> Result<(), StrError> {
        if cs2.dim() != self.jlm.dim() {
            return Err("the coefficient vector is incompatible with the averages");
        }
        for i in 0..cs2.dim() {
            cs2[i] = self.jlm[i] / self.jmm[i];
        }
        vec_clip_max(cs2, CS2_MAX);
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{AveragerPhase, LagrangianAverager};
    use crate::base::{TensorLayout, CS2_MAX, JLM_MIN};
    use crate::les::SymTensorField;
    use russell_lab::{approx_eq, Vector};

    // L = (1, 0.5, -1) and M = (2, 1, -2)  ⇒  L:M = 2 + 2·0.5 + 2 = 5  and  M:M = 4 + 2 + 4 = 10
    fn sample_tensors(ndof: usize) -> (SymTensorField, SymTensorField) {
        let mut lij = SymTensorField::new(TensorLayout::TwoDim, ndof);
        let mut mij = SymTensorField::new(TensorLayout::TwoDim, ndof);
        lij.comps[0].fill(1.0);
        lij.comps[1].fill(0.5);
        lij.comps[2].fill(-1.0);
        mij.comps[0].fill(2.0);
        mij.comps[1].fill(1.0);
        mij.comps[2].fill(-2.0);
        (lij, mij)
    }

    #[test]
    fn bootstrap_overwrites_the_initial_values() {
        let (lij, mij) = sample_tensors(2);
        let delta_sq = Vector::filled(2, 0.01);
        let mut averager = LagrangianAverager::new(2, 123.0, 456.0);
        assert_eq!(averager.phase(), AveragerPhase::Bootstrap);
        averager.advance(&lij, &mij, &delta_sq, 0.2).unwrap();
        assert_eq!(averager.phase(), AveragerPhase::Steady);
        for i in 0..2 {
            approx_eq(averager.jlm()[i], 0.04 * 10.0, 1e-15);
            approx_eq(averager.jmm()[i], 10.0, 1e-15);
        }
    }

    #[test]
    fn steady_phase_relaxes_the_averages() {
        let (lij, mij) = sample_tensors(1);
        let delta_sq = Vector::filled(1, 0.04);
        let mut averager = LagrangianAverager::new(1, 0.0, 1.0);
        averager.advance(&lij, &mij, &delta_sq, 0.2).unwrap();
        let (jlm, jmm) = (averager.jlm()[0], averager.jmm()[0]);
        averager.advance(&lij, &mij, &delta_sq, 0.2).unwrap();
        let gamma = f64::powf(jlm * jmm, 0.125) / (1.5 * 0.2);
        let eps = gamma / (1.0 + gamma);
        approx_eq(averager.jlm()[0], eps * 5.0 + (1.0 - eps) * jlm, 1e-14);
        approx_eq(averager.jmm()[0], eps * 10.0 + (1.0 - eps) * jmm, 1e-14);
    }

    #[test]
    fn jlm_never_drops_below_the_floor() {
        let (mut lij, mij) = sample_tensors(1);
        for comp in &mut lij.comps {
            for x in comp.as_mut_data() {
                *x = -100.0 * *x;
            }
        }
        let delta_sq = Vector::filled(1, 0.01);
        let mut averager = LagrangianAverager::new(1, 0.0, 1.0);
        averager.advance(&lij, &mij, &delta_sq, 0.1677).unwrap();
        for _ in 0..3 {
            averager.advance(&lij, &mij, &delta_sq, 0.1677).unwrap();
            assert!(averager.jlm()[0] >= JLM_MIN);
        }
        assert_eq!(averager.jlm()[0], JLM_MIN);
    }

    #[test]
    fn coefficient_is_bounded() {
        let (lij, mut mij) = sample_tensors(3);
        mij.comps[0][1] = 0.0;
        mij.comps[1][1] = 0.0;
        mij.comps[2][1] = 0.0;
        let delta_sq = Vector::filled(3, 0.01);
        let mut averager = LagrangianAverager::new(3, 0.0, 1.0);
        averager.advance(&lij, &mij, &delta_sq, 0.1).unwrap();
        let mut cs2 = Vector::new(3);
        averager.coefficient(&mut cs2).unwrap();
        approx_eq(cs2[0], 0.01, 1e-15);
        // JMM = 0 ⇒ JLM / JMM = NaN ⇒ upper bound
        assert_eq!(cs2[1], CS2_MAX);
        for i in 0..3 {
            assert!(cs2[i] <= CS2_MAX);
        }
        let mut wrong = Vector::new(2);
        assert_eq!(
            averager.coefficient(&mut wrong).err(),
            Some("the coefficient vector is incompatible with the averages")
        );
    }

    #[test]
    fn coefficient_clips_large_finite_ratios() {
        // bootstrap with Cs = 1  ⇒  JLM = Cs² M:M = 10  and  JMM = 10  ⇒  JLM / JMM = 1 > 0.1
        let (lij, mij) = sample_tensors(2);
        let delta_sq = Vector::filled(2, 0.01);
        let mut averager = LagrangianAverager::new(2, 0.0, 1.0);
        averager.advance(&lij, &mij, &delta_sq, 1.0).unwrap();
        approx_eq(averager.jlm()[0] / averager.jmm()[0], 1.0, 1e-15);
        let mut cs2 = Vector::new(2);
        averager.coefficient(&mut cs2).unwrap();
        assert_eq!(cs2.as_data(), &[CS2_MAX, CS2_MAX]);
    }
}
