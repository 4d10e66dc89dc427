//! Client state.
//!
//! DESIGN
//! ======
//! The session owns everything the view reads and is mutated only from the
//! event loop. Timers are deadlines polled by that loop rather than spawned
//! tasks, so a cancelled countdown can never fire late.

pub mod session;
pub mod typing;
