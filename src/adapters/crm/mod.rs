pub mod rd_station;
