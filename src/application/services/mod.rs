pub mod webhook_gateway;
