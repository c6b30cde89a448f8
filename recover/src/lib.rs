//! Gate-chain recovery passes that run after an earlier bit-blasting step:
//! folding adder/subtractor chains back into word-level cells, recognizing
//! toggle-flipflop counters, and debusing commutative-cell outputs.

mod adder;
mod bus_extract;
mod errors;
mod tff_counter;

pub use adder::recover_adders;
pub use bus_extract::extract_buses;
pub use errors::RecoverError;
pub use tff_counter::recover_tff_counters;

#[cfg(test)]
mod tests;
