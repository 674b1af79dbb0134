
mod errors;
mod steps;
