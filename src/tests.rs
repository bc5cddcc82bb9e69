mod device;
mod registry;
mod volume;
