// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod clock;
pub mod feed;
pub mod icons;
pub mod kiosk;
pub mod model;
pub mod news;
pub mod orchestrator;
pub mod pager;
pub mod routes;
pub mod theme;

pub use clock::*;
pub use feed::*;
pub use icons::*;
pub use kiosk::*;
pub use model::*;
pub use news::*;
pub use orchestrator::*;
pub use pager::*;
pub use routes::*;
pub use theme::*;
