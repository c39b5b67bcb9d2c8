//! # Crayon Compositor
//!
//! Post-processing compositor chains for viewports. An effect is declared once as a
//! [`Technique`](compositor/technique/struct.Technique.html), a small graph of local render
//! textures and target passes, and is then instantiated per viewport. Instances are strung
//! together into a [`CompositorChain`](compositor/chain/struct.CompositorChain.html), which
//! compiles the declarative passes into ordered batches of render operations and hands them
//! to a pluggable backend.
//!
//! ## Modules
//!
//! - `compositor`: techniques, instances, chains and the pass compiler.
//! - `video`: the narrow interfaces this crate consumes from the renderer, texture provider
//! and material system, plus a headless backend.
//! - `utils`: handles, pools and colors shared by everything above.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! let mut manager = CompositorManager::new(Box::new(HeadlessVisitor::new()), settings);
//! manager.register(bloom);
//!
//! let vp = manager.create_viewport(Viewport::new(Vector2::new(1280, 720)));
//! manager.add_compositor(vp, "Bloom", None)?;
//! manager.set_compositor_enabled(vp, "Bloom", true)?;
//! manager.render(vp, &mut renderer)?;
//! ```

extern crate failure;
#[macro_use]
extern crate log;
extern crate cgmath;
extern crate serde;
extern crate serde_json;
extern crate smallvec;

#[macro_use]
pub mod utils;
pub mod errors;
pub mod math;

pub mod compositor;
pub mod video;

pub mod prelude;
