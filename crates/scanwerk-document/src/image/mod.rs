// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module: encoding round trips, floating-point channel planes, and
// RGB <-> Lab conversion used by the enhancement strategies.

pub mod codec;
pub mod color;
pub mod plane;

pub use plane::Plane;
