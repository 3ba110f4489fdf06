//! Swipe-controlled virtual backdrop.
//!
//! A depth sensor reports skeletons and a background-removed cutout of the
//! player it is told to follow. The session picks the nearest player, turns
//! horizontal hand swipes into background changes and composites the cutout
//! over the current background.
//!
//! | Input | Action |
//! |---|---|
//! | `SwipeToRight` | next background |
//! | `SwipeToLeft` | previous background |
//! | button `N` | background `N` |

pub mod backgrounds;
pub mod config;
pub mod gesture;
pub mod pipeline;
pub mod session;
pub mod skeleton;
pub mod types;
