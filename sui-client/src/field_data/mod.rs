pub mod data_structions;
