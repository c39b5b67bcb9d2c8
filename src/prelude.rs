pub use crate::compositor::prelude::*;
pub use crate::errors::{Error, Result};
pub use crate::math::prelude::Vector2;
pub use crate::utils::prelude::*;
pub use crate::video::prelude::*;
