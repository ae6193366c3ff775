pub mod incident_type;
