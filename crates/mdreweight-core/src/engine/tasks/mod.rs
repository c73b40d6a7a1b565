pub mod frame_energy;
