pub mod fixed_size_table;
