use std::time::Instant;

use thrust_nav::{Simulation, SimulationAttributes};

/// Give up after this many frames.
const MAX_FRAMES: usize = 60 * 120;

fn main() {
    let attributes = SimulationAttributes {
        seed: Some(1),
        ..Default::default()
    };
    let mut sim = match Simulation::new(&attributes) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("Invalid attributes: {}", err);
            std::process::exit(1);
        }
    };

    println!(
        "Simulating with {} obstacles and a {}-point route...",
        sim.obstacles().len(),
        sim.waypoints().len()
    );
    let num_frames = 60;
    let dt = attributes.controller.dt;
    while sim.frame() < MAX_FRAMES && !sim.reached_target() && !sim.state().collided {
        let start = Instant::now();
        for _ in 0..num_frames {
            sim.step();
        }
        let frame = start.elapsed() / num_frames;
        println!(
            "Avg. frame: {:?} --> {:.1}x real time, at ({:.0}, {:.0}), fuel {:.0}",
            frame,
            dt / frame.as_secs_f64(),
            sim.state().position.x,
            sim.state().position.y,
            sim.state().fuel,
        );
    }

    let outcome = if sim.reached_target() {
        "Reached the target"
    } else if sim.state().collided {
        "Collided"
    } else {
        "Gave up"
    };
    println!("{} after {} frames", outcome, sim.frame());
}
