mod basic;
mod config;
mod lines;
mod models;
