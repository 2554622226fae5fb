pub mod apply;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod contract;
pub mod error;
pub mod ir;
pub mod matcher;
pub mod path_de;
pub mod reflect;
pub mod suggest;
pub mod synth;
pub mod workspace;
