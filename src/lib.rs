pub mod flow;
pub mod net;
pub mod sim;
pub mod stats;
pub mod topo;

#[cfg(test)]
mod test;
