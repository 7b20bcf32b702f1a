//! Python bindings (`pylib` feature): a thin `pyo3` surface over
//! [`crate::CellState`] for the chemical-reaction subset of the model —
//! sequence occupancy and binding sites are not exposed here, since a
//! script-level API for them belongs to the external parser's domain
//! vocabulary, not this crate's contract.

use std::collections::HashMap;

use pyo3::prelude::*;

use crate::cellstate::CellState;
use crate::config::Config;
use crate::manager::RateManagerVariant;
use crate::rate::RateContainerVariant;
use crate::reactant::Reactant;
use crate::reaction::Reaction;
use crate::solver::SolverVariant;

/// A chemical reaction network, buildable and runnable from Python.
#[pyclass]
struct Gillespie {
    species: HashMap<String, usize>,
    reactions: Vec<(f64, Vec<String>, Vec<String>)>,
}

#[pymethods]
impl Gillespie {
    #[new]
    fn new() -> Self {
        Gillespie {
            species: HashMap::new(),
            reactions: Vec::new(),
        }
    }

    fn nb_species(&self) -> PyResult<usize> {
        Ok(self.species.len())
    }

    fn nb_reactions(&self) -> PyResult<usize> {
        Ok(self.reactions.len())
    }

    /// Adds a law-of-mass-action reaction. Adds the reverse reaction too
    /// (spec §4.6 bidirectional pairs) if `reverse_rate` is given.
    #[pyo3(signature = (rate, reactants, products, reverse_rate=None))]
    fn add_reaction(
        &mut self,
        rate: f64,
        reactants: Vec<String>,
        products: Vec<String>,
        reverse_rate: Option<f64>,
    ) -> PyResult<()> {
        for name in reactants.iter().chain(products.iter()) {
            if !self.species.contains_key(name) {
                self.species.insert(name.clone(), self.species.len());
            }
        }
        self.reactions
            .push((rate, reactants.clone(), products.clone()));
        if let Some(reverse_rate) = reverse_rate {
            self.reactions.push((reverse_rate, products, reactants));
        }
        Ok(())
    }

    /// Runs from `init` to `tmax` in `nb_steps` uniformly spaced samples
    /// (or every reaction, if `nb_steps == 0`), returning `(times, vars)`.
    #[pyo3(signature = (init, tmax, nb_steps, seed=None))]
    fn run(
        &self,
        init: HashMap<String, i64>,
        tmax: f64,
        nb_steps: usize,
        seed: Option<u64>,
    ) -> PyResult<(Vec<f64>, HashMap<String, Vec<i64>>)> {
        let config = Config {
            seed: seed.unwrap_or(0),
            final_time: tmax,
            solver: SolverVariant::Naive,
            rates: RateContainerVariant::Vector,
            manager: RateManagerVariant::Naive,
            ..Config::default()
        };
        let mut cs = CellState::new(&config);
        for name in self.species.keys() {
            let count = init.get(name).copied().unwrap_or(0);
            cs.register_reactant(name.clone(), Reactant::new_free_chemical(name.clone(), count));
        }
        for (rate, reactants, products) in &self.reactions {
            let mut counts: HashMap<&str, u32> = HashMap::new();
            for r in reactants {
                *counts.entry(r.as_str()).or_default() += 1;
            }
            let reactant_terms = counts
                .iter()
                .map(|(&name, &nu)| (cs.reactant_id(name).unwrap(), nu))
                .collect();
            let mut product_counts: HashMap<&str, u32> = HashMap::new();
            for p in products {
                *product_counts.entry(p.as_str()).or_default() += 1;
            }
            let product_terms = product_counts
                .iter()
                .map(|(&name, &nu)| (cs.reactant_id(name).unwrap(), nu))
                .collect();
            cs.register_reaction(Reaction::new_chemical(reactant_terms, product_terms, *rate));
        }

        let mut times = Vec::new();
        let mut series: HashMap<String, Vec<i64>> =
            self.species.keys().map(|n| (n.clone(), Vec::new())).collect();
        let sample = |cs: &CellState, times: &mut Vec<f64>, series: &mut HashMap<String, Vec<i64>>| {
            times.push(cs.simulation_time());
            for (name, values) in series.iter_mut() {
                values.push(cs.chemical_number(name).unwrap());
            }
        };
        if nb_steps > 0 {
            for i in 0..=nb_steps {
                let t = tmax * i as f64 / nb_steps as f64;
                while cs.simulation_time() < t {
                    if cs.perform_next_reaction().is_err() {
                        break;
                    }
                }
                sample(&cs, &mut times, &mut series);
            }
        } else {
            sample(&cs, &mut times, &mut series);
            while cs.simulation_time() < tmax {
                if cs.perform_next_reaction().is_err() {
                    break;
                }
                sample(&cs, &mut times, &mut series);
            }
        }
        Ok((times, series))
    }

    fn __str__(&self) -> PyResult<String> {
        let mut s = format!(
            "{} species and {} reactions\n",
            self.species.len(),
            self.reactions.len()
        );
        for (rate, reactants, products) in &self.reactions {
            s.push_str(&reactants.join(" + "));
            s.push_str(" --> ");
            s.push_str(&products.join(" + "));
            s.push_str(&format!(" @ {rate}\n"));
        }
        Ok(s)
    }
}

#[pymodule]
fn biossa(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<Gillespie>()?;
    Ok(())
}
