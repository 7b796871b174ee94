//! Integration tests for the fleetsweep scan pipeline

mod http_clients;
mod scan_flows;
