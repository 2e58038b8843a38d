// Gateway module for runtime - follows the Train Station Pattern
// All external access must go through this gateway

mod campus;

pub use campus::CampusCore;
