// Domain layer - Telemetry, selection and series models
pub mod lna;
pub mod packet;
pub mod palette;
pub mod selection;
pub mod series;
pub mod window;
