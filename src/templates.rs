//! Templates for the four generation passes: header, enumerations, per-message structures and
//! footer. See [`template`](crate::template) for the marker syntax.

pub const HEADER: &str = r#"
using System;
using System.Collections.Generic;
using System.Text;
using System.Runtime.InteropServices;

public partial class ${class_name}
{
    public const string MAVLINK_BUILD_DATE = "${parse_time}";
    public const string MAVLINK_WIRE_PROTOCOL_VERSION = "${wire_protocol_version}";
    public const int MAVLINK_MAX_PAYLOAD_LEN = ${largest_payload};

    public const byte MAVLINK_CORE_HEADER_LEN = 9;///< Length of core header (of the comm. layer)
    public const byte MAVLINK_CORE_HEADER_MAVLINK1_LEN = 5;///< Length of MAVLink1 core header (of the comm. layer)
    public const byte MAVLINK_NUM_HEADER_BYTES = (MAVLINK_CORE_HEADER_LEN + 1);///< Length of all header bytes, including core and stx
    public const byte MAVLINK_NUM_CHECKSUM_BYTES = 2;
    public const byte MAVLINK_NUM_NON_PAYLOAD_BYTES = (MAVLINK_NUM_HEADER_BYTES + MAVLINK_NUM_CHECKSUM_BYTES);

    public const int MAVLINK_MAX_PACKET_LEN = (MAVLINK_MAX_PAYLOAD_LEN + MAVLINK_NUM_NON_PAYLOAD_BYTES + MAVLINK_SIGNATURE_BLOCK_LEN);///< Maximum packet length
    public const byte MAVLINK_SIGNATURE_BLOCK_LEN = 13;

    public const int MAVLINK_LITTLE_ENDIAN = 1;
    public const int MAVLINK_BIG_ENDIAN = 0;

    public const byte MAVLINK_STX = ${protocol_marker};

    public const byte MAVLINK_STX_MAVLINK1 = 0xFE;

    public const byte MAVLINK_ENDIAN = ${mavlink_endian};

    public const bool MAVLINK_ALIGNED_FIELDS = (${aligned_fields_define} == 1);

    public const byte MAVLINK_CRC_EXTRA = ${crc_extra_define};

    public const byte MAVLINK_COMMAND_24BIT = ${command_24bit_define};

    public const bool MAVLINK_NEED_BYTE_SWAP = (MAVLINK_ENDIAN == MAVLINK_LITTLE_ENDIAN);

    // msgid, name, crc, minlength, length, type
    public static readonly message_info[] MAVLINK_MESSAGE_INFOS = new message_info[] {
${{registry:        new message_info(${id}, "${name}", ${crc_extra}, ${min_length}, ${length}, typeof( ${type_name} )),
}}    };

    public const byte MAVLINK_VERSION = ${version};

    public const byte MAVLINK_IFLAG_SIGNED = 0x01;
    public const byte MAVLINK_IFLAG_MASK = 0x01;

    public static readonly Dictionary<uint, byte> MAVLINK_MESSAGE_LENGTHS = new Dictionary<uint, byte>() {
${{registry:        { ${id}, ${length} },
}}    };

    public static readonly Dictionary<uint, byte> MAVLINK_MESSAGE_CRCS = new Dictionary<uint, byte>() {
${{registry:        { ${id}, ${crc_extra} },
}}    };

    public static readonly Dictionary<uint, Type> MAVLINK_MESSAGE_INFO = new Dictionary<uint, Type>() {
${{registry:        { ${id}, typeof( ${type_name} ) },
}}    };

    public static readonly Dictionary<uint, string> MAVLINK_NAMES = new Dictionary<uint, string>() {
${{registry:        { ${id}, "${name}" },
}}    };

    public struct message_info
    {
        public uint msgid;
        public string name;
        public byte crc;
        public uint minlength;
        public uint length;
        public Type type;

        public message_info(uint msgid, string name, byte crc, uint minlength, uint length, Type type)
        {
            this.msgid = msgid;
            this.name = name;
            this.crc = crc;
            this.minlength = minlength;
            this.length = length;
            this.type = type;
        }
    }

    public enum MAVLINK_MSG_ID
    {
${{registry:        ${name} = ${id},
}}    }
"#;

pub const ENUMS: &str = r#"${{enum:
    ///<summary> ${description} </summary>
    public enum ${name}${underlying}
    {
${{entry:        ///<summary> ${description} |${{param:${description}| }} </summary>
        ${name}=${value},
}}
    };
}}"#;

pub const MESSAGE: &str = r#"

    /// <summary> ${description} </summary>
    [StructLayout(LayoutKind.Sequential,Pack=1,Size=${wire_length})]
    public struct ${type_name}
    {
${{constructor:        public ${type_name}(${arg_list})
        {
${{fields:            this.${name} = ${putname};
}}        }

}}${{ordered_fields:        /// <summary> ${description} </summary>
        ${array_prefix} ${type} ${name}${array_suffix};
}}    };
"#;

pub const FOOTER: &str = "\n}\n";
