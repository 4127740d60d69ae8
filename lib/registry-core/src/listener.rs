/// Event-bus hook fired once a registration is acknowledged by the registry
pub trait RegistrationListener: Send + Sync {
    fn registration_complete(&self);
}
