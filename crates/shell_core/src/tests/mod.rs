mod request_queue_tests;
mod session_store_tests;
