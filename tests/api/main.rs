mod helpers;
mod websocket;
