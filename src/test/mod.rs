mod config;
mod priority_queue;
mod retx;
mod scenario;
mod sim_time;
mod strategy;
mod support;
