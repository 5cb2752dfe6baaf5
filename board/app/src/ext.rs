include!(concat!(env!("OUT_DIR"), "/_ext.rs"));
