// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// cardscan-editor — the interactive correction tool.
//
// One `EditorState` value per editing session, driven by pointer/touch events
// and slider changes. Three modes (adjust, crop, keystone) each carry their own
// geometry and drag session; a commit applies the current mode's single
// geometry operation and hands back the finished raster.

pub mod crop;
pub mod keystone;
pub mod mode;
pub mod pointer;
pub mod session;

pub use mode::{Adjustments, EditorMode, ModeKind};
pub use pointer::{DeviceKind, PointerEvent, PointerOutcome, PointerPhase, Viewport};
pub use session::{CommitResult, CommittedGeometry, EditorState};
