//! Simulation of a drug moving from an absorption depot into blood, exchanging
//! with tissue and binding reversibly to a target protein in the tissue.
//!
//! ```text
//!     kabs            k1           kon
//!  I  --->   Iblood  ----> Itissue ---->  EI
//!            |       <----         <----
//!            | kout   k2           koff
//!           \/
//! ```
//!
//! The state `[Iblood, Itissue, f]` is integrated with an implicit BDF solver,
//! since `kon` is usually many orders of magnitude larger than the other rates.
//!
//! ```rust,ignore
//! use pkbind::prelude::*;
//!
//! let simulation = SimulationConfig::default().validate()?;
//! let output = simulation.run()?;
//! println!("{}", output.trajectory.diagnostics());
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod simulator;

pub use crate::config::SimulationConfig;
pub use crate::data::*;
pub use crate::simulator::forcing::Forcing;
pub use crate::simulator::model::TargetEngagement;
pub use crate::simulator::ode::{integrate, SolverSettings};
pub use crate::simulator::trajectory::{SolverDiagnostics, Trajectory};
pub use crate::simulator::{NumericChecks, Simulation, SimulationOutput};
pub use error::PkbindError;

pub mod prelude {
    pub mod data {
        pub use crate::data::{Dose, DoseSchedule, Rates, State, TimeGrid};
    }
    pub mod simulator {
        pub use crate::simulator::{
            forcing::Forcing,
            model::TargetEngagement,
            ode::{integrate, SolverSettings},
            trajectory::{SolverDiagnostics, Trajectory},
            NumericChecks, Simulation, SimulationOutput,
        };
    }

    pub use crate::config::SimulationConfig;
    pub use crate::data::*;
    pub use crate::report::{ImageFormat, ReportConfig, Reporter};
    pub use crate::simulator::{
        forcing::Forcing,
        model::TargetEngagement,
        ode::{integrate, SolverSettings},
        trajectory::{SolverDiagnostics, Trajectory},
        NumericChecks, Simulation, SimulationOutput,
    };
    pub use crate::PkbindError;
}
