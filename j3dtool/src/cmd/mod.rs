pub mod bmd;
