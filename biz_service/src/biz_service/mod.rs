pub mod country_service;
