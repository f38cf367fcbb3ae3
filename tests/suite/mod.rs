mod binary;
mod scenarios;
mod sweeps;
