//! Reversible isomerization A ⇌ B (spec §8 scenario 2), run to completion
//! and reported as a CSV time series on stdout.

use biossa::cellstate::CellState;
use biossa::config::Config;
use biossa::manager::RateManagerVariant;
use biossa::rate::RateContainerVariant;
use biossa::reactant::Reactant;
use biossa::solver::SolverVariant;

fn main() {
    tracing_subscriber::fmt::init();

    let config = Config {
        volume: 1.0,
        seed: 42,
        initial_time: 0.0,
        final_time: 50.0,
        output_dir: None,
        solver: SolverVariant::ManualDispatch,
        rates: RateContainerVariant::Hybrid,
        manager: RateManagerVariant::Dependency,
        ignored_variation_visible: true,
    };
    let mut cs = CellState::new(&config);
    let a = cs.register_reactant("A", Reactant::new_free_chemical("A", 80));
    let b = cs.register_reactant("B", Reactant::new_free_chemical("B", 20));
    cs.register_bidirectional_chemical(vec![(a, 1)], vec![(b, 1)], 1.0, 1.0);

    println!("time,A,B");
    println!("{},{},{}", cs.simulation_time(), cs.chemical_number("A").unwrap(), cs.chemical_number("B").unwrap());
    while cs.simulation_time() < config.final_time {
        if cs.perform_next_reaction().is_err() {
            break;
        }
        println!(
            "{},{},{}",
            cs.simulation_time(),
            cs.chemical_number("A").unwrap(),
            cs.chemical_number("B").unwrap()
        );
    }
}
