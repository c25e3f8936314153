mod coordinated;
mod homing;
mod motion;
mod orchestrator;
mod persistence;
mod rig;
mod transfer;
