pub mod color;
pub mod dataset;
pub mod legend;
pub mod scale;
pub mod states;
pub mod topology;

pub use color::{ColorParseError, Rgb};
pub use dataset::{Dataset, DatumValue, ResolvedState, StateDatum};
pub use scale::{ColorScale, ScaleMode};
pub use states::{KeyMode, STATES, StateRef};
pub use topology::{StateFeature, StatesGeometry, Topology, TopologyError};
