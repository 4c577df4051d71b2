pub mod app;
pub mod fw;
pub mod net;
pub mod qos;
pub mod queue;
pub mod scenario;
pub mod sim;
pub mod topo;
pub mod trace;

#[cfg(test)]
mod test;
