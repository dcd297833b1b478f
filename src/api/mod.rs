pub mod flink_session_cluster;
