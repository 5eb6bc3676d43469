mod end_to_end;
mod handshake;
mod sim_time;
