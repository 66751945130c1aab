//! Tour navigation: the live session, the navigator state machine and the
//! render-facing stage it drives.

mod navigator;
mod session;
mod stage;

#[cfg(test)]
mod tests;

pub use navigator::{NoopListener, TourListener, TourNavigator, TourState, ViewerPosition};
pub use session::TourSession;
pub use stage::{Background, Playback, Stage};
