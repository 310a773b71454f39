pub mod fishbone;
