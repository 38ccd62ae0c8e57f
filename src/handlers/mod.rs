// handlers/mod.rs - handler tiers
//
// Public (no token) → Protected (tenant or super-admin token, enforced by the
// gate middleware the router mounts in front of them)
pub mod protected;
pub mod public;
