// Atelier Infrastructure - EC2 Host Adapters
// Implements: InstanceController

pub mod instance_controller;

pub use instance_controller::Ec2InstanceController;
