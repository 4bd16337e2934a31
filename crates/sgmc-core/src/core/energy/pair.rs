use super::{EnergyError, EnergyOracle, Evaluation};
use crate::core::models::slab::Slab;
use crate::core::utils::geometry;
use nalgebra::Vector3;
use std::collections::BTreeMap;
use tracing::trace;

/// Per-species Lennard-Jones parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LjParams {
    /// Well depth (epsilon) in the run's energy units.
    pub epsilon: f64,
    /// Zero-crossing distance (sigma) in Angstroms.
    pub sigma: f64,
}

/// A 12-6 Lennard-Jones pair-potential oracle with minimum-image convention.
///
/// Cross-species parameters follow Lorentz-Berthelot mixing. Relaxation, when
/// requested, is a fixed-substrate steepest descent: the first `frozen` atoms
/// (the pristine slab) are held in place and only the appended adsorbates move.
/// This is a demonstration model, not a production force field; the engine
/// accepts any [`EnergyOracle`] in its place.
#[derive(Debug, Clone, PartialEq)]
pub struct LennardJones {
    params: BTreeMap<String, LjParams>,
    cutoff: f64,
    frozen: usize,
    relax_steps: usize,
    step_size: f64,
    force_tolerance: f64,
}

impl LennardJones {
    /// Creates an oracle from per-species parameters and an interaction cutoff.
    ///
    /// # Arguments
    ///
    /// * `params` - Lennard-Jones parameters keyed by element symbol.
    /// * `cutoff` - Pair interaction cutoff in Angstroms.
    /// * `frozen` - Number of leading slab atoms held fixed during relaxation.
    pub fn new(params: BTreeMap<String, LjParams>, cutoff: f64, frozen: usize) -> Self {
        Self {
            params,
            cutoff,
            frozen,
            relax_steps: 20,
            step_size: 0.05,
            force_tolerance: 0.2,
        }
    }

    /// Overrides the relaxation step count and convergence force tolerance.
    pub fn with_relaxation(mut self, steps: usize, step_size: f64, force_tolerance: f64) -> Self {
        self.relax_steps = steps;
        self.step_size = step_size;
        self.force_tolerance = force_tolerance;
        self
    }

    fn pair_params(&self, a: &str, b: &str) -> Result<LjParams, EnergyError> {
        let pa = self
            .params
            .get(a)
            .ok_or_else(|| EnergyError::MissingParameters(a.to_string()))?;
        let pb = self
            .params
            .get(b)
            .ok_or_else(|| EnergyError::MissingParameters(b.to_string()))?;
        Ok(LjParams {
            epsilon: (pa.epsilon * pb.epsilon).sqrt(),
            sigma: 0.5 * (pa.sigma + pb.sigma),
        })
    }

    /// Computes per-atom energies and forces for the current positions.
    fn evaluate_static(
        &self,
        slab: &Slab,
    ) -> Result<(Vec<f64>, Vec<Vector3<f64>>), EnergyError> {
        let n = slab.len();
        let mut energies = vec![0.0; n];
        let mut forces = vec![Vector3::zeros(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let ai = slab.atom(i).ok_or_else(|| {
                    EnergyError::Evaluation(format!("atom index {i} out of bounds"))
                })?;
                let aj = slab.atom(j).ok_or_else(|| {
                    EnergyError::Evaluation(format!("atom index {j} out of bounds"))
                })?;
                let d = geometry::minimum_image(&aj.position, &ai.position, slab.cell());
                let r = d.norm();
                if r >= self.cutoff || r == 0.0 {
                    continue;
                }
                let p = self.pair_params(&ai.species, &aj.species)?;
                let s6 = (p.sigma / r).powi(6);
                let s12 = s6 * s6;
                let e = 4.0 * p.epsilon * (s12 - s6);
                energies[i] += 0.5 * e;
                energies[j] += 0.5 * e;
                let f = 24.0 * p.epsilon * (2.0 * s12 - s6) / (r * r) * d;
                forces[i] += f;
                forces[j] -= f;
            }
        }
        Ok((energies, forces))
    }

    fn relax(&self, slab: &Slab) -> Result<Slab, EnergyError> {
        let mut relaxed = slab.clone();
        for step in 0..self.relax_steps {
            let (_, forces) = self.evaluate_static(&relaxed)?;
            let max_force = forces
                .iter()
                .skip(self.frozen)
                .map(|f| f.norm())
                .fold(0.0, f64::max);
            if max_force < self.force_tolerance {
                trace!(step, max_force, "relaxation converged");
                break;
            }
            for (index, atom) in relaxed.atoms_iter_mut().enumerate() {
                if index < self.frozen {
                    continue;
                }
                atom.position += self.step_size * forces[index];
            }
        }
        Ok(relaxed)
    }
}

impl EnergyOracle for LennardJones {
    fn evaluate(&mut self, slab: &Slab, relax: bool) -> Result<Evaluation, EnergyError> {
        let relaxed = if relax { Some(self.relax(slab)?) } else { None };
        let target = relaxed.as_ref().unwrap_or(slab);
        let (energies, forces) = self.evaluate_static(target)?;
        let energy = energies.iter().sum();
        let max_force = forces.iter().map(|f| f.norm()).fold(0.0, f64::max);
        Ok(Evaluation {
            energy,
            energy_std: None,
            max_force: Some(max_force),
            force_std: None,
            per_atom_energies: Some(energies),
            relaxed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::slab::Cell;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    fn oracle() -> LennardJones {
        let mut params = BTreeMap::new();
        params.insert(
            "Cu".to_string(),
            LjParams {
                epsilon: 1.0,
                sigma: 1.0,
            },
        );
        LennardJones::new(params, 10.0, 0)
    }

    fn dimer(r: f64) -> Slab {
        let atoms = vec![
            Atom::new("Cu", Point3::new(0.0, 0.0, 0.0)),
            Atom::new("Cu", Point3::new(r, 0.0, 0.0)),
        ];
        Slab::new(atoms, Cell::isolated(Vector3::new(50.0, 50.0, 50.0)))
    }

    #[test]
    fn dimer_energy_at_minimum() {
        // The 12-6 minimum sits at r = 2^(1/6) sigma with depth -epsilon.
        let slab = dimer(2.0_f64.powf(1.0 / 6.0));
        let eval = oracle().evaluate(&slab, false).unwrap();
        assert_relative_eq!(eval.energy, -1.0, epsilon = 1e-9);
        assert_relative_eq!(eval.max_force.unwrap(), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn per_atom_energies_sum_to_total() {
        let slab = dimer(1.3);
        let eval = oracle().evaluate(&slab, false).unwrap();
        let per_atom: f64 = eval.per_atom_energies.unwrap().iter().sum();
        assert_relative_eq!(per_atom, eval.energy, epsilon = 1e-12);
    }

    #[test]
    fn relaxation_moves_toward_the_minimum() {
        let slab = dimer(1.4);
        let unrelaxed = oracle().evaluate(&slab, false).unwrap().energy;
        let mut relaxing = oracle().with_relaxation(200, 0.01, 1e-4);
        let eval = relaxing.evaluate(&slab, true).unwrap();
        assert!(eval.energy < unrelaxed);
        assert!(eval.relaxed.is_some());
    }

    #[test]
    fn missing_species_parameters_error() {
        let mut slab = dimer(1.2);
        slab.push(Atom::new("O", Point3::new(0.0, 1.2, 0.0)));
        let err = oracle().evaluate(&slab, false).unwrap_err();
        assert!(matches!(err, EnergyError::MissingParameters(s) if s == "O"));
    }
}
